use std::fmt;

/// Size in points used when no sizing tag is in effect.
pub const DEFAULT_FONT_SIZE: u16 = 12;

/// Smallest size a run of `<small>` tags can shrink text to.
pub const MIN_FONT_SIZE: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Weight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Slant {
    #[default]
    Roman,
    Italic,
}

/// Style descriptor for a run of text: the cache key of the metrics
/// service and the style a surface draws a fragment with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontStyle {
    pub size: u16,
    pub weight: Weight,
    pub slant: Slant,
}

impl Default for FontStyle {
    fn default() -> Self {
        Self {
            size: DEFAULT_FONT_SIZE,
            weight: Weight::Normal,
            slant: Slant::Roman,
        }
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}pt", self.size)?;
        if self.weight == Weight::Bold {
            f.write_str(" bold")?;
        }
        if self.slant == Slant::Italic {
            f.write_str(" italic")?;
        }
        Ok(())
    }
}

impl FontStyle {
    pub fn new(size: u16, weight: Weight, slant: Slant) -> Self {
        Self { size, weight, slant }
    }

    pub fn bold(self) -> Self {
        Self { weight: Weight::Bold, ..self }
    }

    pub fn italic(self) -> Self {
        Self { slant: Slant::Italic, ..self }
    }

    pub fn resized(self, delta: i32) -> Self {
        let size = (i32::from(self.size) + delta).clamp(i32::from(MIN_FONT_SIZE), i32::from(u16::MAX));
        Self { size: size as u16, ..self }
    }

    /// Style in effect inside an element with the given tag.
    ///
    /// The caller keeps its own value and uses it again once the element's
    /// subtree is done, so every modifier is undone exactly at the close.
    pub fn enter(self, tag: &str) -> Self {
        match tag {
            "i" | "em" => self.italic(),
            "b" | "strong" => self.bold(),
            "small" => self.resized(-2),
            "big" => self.resized(4),
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style() {
        let style = FontStyle::default();
        assert_eq!(style.size, 12);
        assert_eq!(style.weight, Weight::Normal);
        assert_eq!(style.slant, Slant::Roman);
    }

    #[test]
    fn test_enter_modifiers() {
        let base = FontStyle::default();
        assert_eq!(base.enter("b").weight, Weight::Bold);
        assert_eq!(base.enter("strong").weight, Weight::Bold);
        assert_eq!(base.enter("i").slant, Slant::Italic);
        assert_eq!(base.enter("em").slant, Slant::Italic);
        assert_eq!(base.enter("big").size, 16);
        assert_eq!(base.enter("small").size, 10);
        assert_eq!(base.enter("span"), base);
    }

    #[test]
    fn test_nested_modifiers_compose() {
        let style = FontStyle::default().enter("big").enter("b").enter("small").enter("i");
        assert_eq!(style, FontStyle::new(14, Weight::Bold, Slant::Italic));
    }

    #[test]
    fn test_size_never_drops_below_minimum() {
        let mut style = FontStyle::default();
        for _ in 0..10 {
            style = style.enter("small");
        }
        assert_eq!(style.size, MIN_FONT_SIZE);
    }

    #[test]
    fn test_display() {
        assert_eq!(FontStyle::default().to_string(), "12pt");
        assert_eq!(FontStyle::default().bold().italic().to_string(), "12pt bold italic");
    }
}
