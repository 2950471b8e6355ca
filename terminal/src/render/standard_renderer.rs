use ratatui::style::{Color, Modifier, Style};

use super::traits::BoardPieceRenderer;
use super::types::{CharDimensions, CharPattern};

const SAUSAGE: Color = Color::Rgb(212, 69, 30);
const SAUSAGE_TAIL: Color = Color::Rgb(160, 52, 23);
const YOLK: Color = Color::Rgb(255, 235, 153);

pub struct StandardRenderer {
    char_dims: CharDimensions,
}

impl StandardRenderer {
    pub fn new(char_dims: CharDimensions) -> Self {
        Self { char_dims }
    }
}

impl BoardPieceRenderer for StandardRenderer {
    fn render_sausage_segment(&self, index: usize, length: usize) -> CharPattern {
        if index == 0 {
            let style = Style::default().fg(SAUSAGE).add_modifier(Modifier::BOLD);
            return CharPattern::single('█', self.char_dims, style);
        }

        // Last 40% of the body is drawn lighter, like the canvas fade
        let fill = if index * 5 >= length * 3 { '▒' } else { '▓' };
        let color = if fill == '▒' { SAUSAGE_TAIL } else { SAUSAGE };
        CharPattern::single(fill, self.char_dims, Style::default().fg(color))
    }

    fn render_egg(&self) -> CharPattern {
        let style = Style::default().fg(YOLK);
        if self.char_dims.horizontal == 2 && self.char_dims.vertical == 1 {
            CharPattern::new(vec![vec!['(', ')']], style)
        } else if self.char_dims.horizontal == 1 && self.char_dims.vertical == 1 {
            CharPattern::new(vec![vec!['●']], style)
        } else {
            // Yolk in the middle, white around it
            let mut chars = vec![vec!['○'; self.char_dims.horizontal]; self.char_dims.vertical];
            chars[self.char_dims.vertical / 2][self.char_dims.horizontal / 2] = '●';
            CharPattern::new(chars, style)
        }
    }

    fn render_empty(&self) -> CharPattern {
        CharPattern::empty(self.char_dims)
    }
}
