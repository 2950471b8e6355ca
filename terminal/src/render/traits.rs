use super::types::CharPattern;

pub trait BoardPieceRenderer {
    /// `index` counts from the head (0) towards the tail of a sausage
    /// `length` segments long.
    fn render_sausage_segment(&self, index: usize, length: usize) -> CharPattern;

    fn render_egg(&self) -> CharPattern;

    fn render_empty(&self) -> CharPattern;
}
