use sha2::{Digest, Sha256};

use crate::types::{Color, Pt, Rect, Size};

pub const DEFAULT_FONT: &str = "Helvetica";
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Drawing operations a print/preview backend has to provide. Coordinates are
/// points in a top-left-origin space.
pub trait Surface {
    fn page_size(&self) -> Size;

    fn mm_to_units(&self, mm: f32) -> Pt {
        Pt::from_mm(mm)
    }

    fn save_state(&mut self);
    fn restore_state(&mut self);
    fn translate(&mut self, x: Pt, y: Pt);
    fn set_font(&mut self, name: &str, size: Pt);
    fn set_fill_color(&mut self, color: Color);
    fn set_stroke_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: Pt);
    fn draw_rect(&mut self, rect: Rect);
    fn fill_rect(&mut self, rect: Rect);
    fn draw_text(&mut self, rect: Rect, align: TextAlign, text: &str);
    fn draw_image(&mut self, rect: Rect, resource_id: &str);
    fn new_page(&mut self);

    // Non-rendered annotations; backends may ignore them.
    fn meta(&mut self, _key: &str, _value: &str) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SaveState,
    RestoreState,
    Translate(Pt, Pt),
    // Non-rendered metadata used for page-aware reporting. Ignored by the PDF renderer.
    Meta {
        key: String,
        value: String,
    },
    SetFillColor(Color),
    SetStrokeColor(Color),
    SetLineWidth(Pt),
    SetFontName(String),
    SetFontSize(Pt),
    // Outline only.
    DrawRect {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
    },
    FillRect {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
    },
    // Single line placed inside the box, vertically centred.
    DrawText {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
        align: TextAlign,
        text: String,
    },
    DrawImage {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
        resource_id: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub commands: Vec<Command>,
}

impl Page {
    fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            Command::DrawText { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|text| text.contains(needle))
    }
}

/// Output of one print run: every page with its recorded commands.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintedDocument {
    pub page_size: Size,
    pub pages: Vec<Page>,
}

impl PrintedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// SHA-256 over the recorded commands; equal layouts give equal fingerprints.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.page_size).as_bytes());
        for (index, page) in self.pages.iter().enumerate() {
            hasher.update(format!("page:{index}").as_bytes());
            for command in &page.commands {
                hasher.update(format!("{command:?}").as_bytes());
            }
        }
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }
}

// Pen state the canvas tracks so unchanged settings are not re-recorded.
#[derive(Debug, Clone, PartialEq)]
struct Pen {
    fill: Color,
    stroke: Color,
    line_width: Pt,
    font: (String, Pt),
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            fill: Color::BLACK,
            stroke: Color::BLACK,
            line_width: Pt::from_f32(1.0),
            font: (DEFAULT_FONT.to_string(), Pt::from_f32(DEFAULT_FONT_SIZE)),
        }
    }
}

/// Recording surface: every call becomes a [`Command`] on the current page.
pub struct Canvas {
    page_size: Size,
    finished: Vec<Page>,
    page: Page,
    pen: Pen,
    saved: Vec<Pen>,
}

impl Canvas {
    pub fn new(page_size: Size) -> Self {
        Self {
            page_size,
            finished: Vec::new(),
            page: Page::new(),
            pen: Pen::default(),
            saved: Vec::new(),
        }
    }

    pub fn current_command_count(&self) -> usize {
        self.page.commands.len()
    }

    pub fn is_current_empty(&self) -> bool {
        self.page.commands.is_empty()
    }

    /// Pages closed so far, not counting the one being drawn.
    pub fn page_count(&self) -> usize {
        self.finished.len()
    }

    /// Closes the open page (an untouched first page still counts) and hands
    /// back everything recorded.
    pub fn finish(mut self) -> PrintedDocument {
        if !self.is_current_empty() || self.finished.is_empty() {
            self.new_page();
        }
        PrintedDocument {
            page_size: self.page_size,
            pages: self.finished,
        }
    }

    fn push(&mut self, command: Command) {
        self.page.commands.push(command);
    }
}

impl Surface for Canvas {
    fn page_size(&self) -> Size {
        self.page_size
    }

    fn save_state(&mut self) {
        self.saved.push(self.pen.clone());
        self.push(Command::SaveState);
    }

    // Unbalanced restores are ignored.
    fn restore_state(&mut self) {
        let Some(pen) = self.saved.pop() else {
            return;
        };
        self.pen = pen;
        self.push(Command::RestoreState);
    }

    fn translate(&mut self, x: Pt, y: Pt) {
        self.push(Command::Translate(x, y));
    }

    fn set_font(&mut self, name: &str, size: Pt) {
        if self.pen.font.0 != name {
            self.pen.font.0 = name.to_string();
            self.push(Command::SetFontName(name.to_string()));
        }
        if self.pen.font.1 != size {
            self.pen.font.1 = size;
            self.push(Command::SetFontSize(size));
        }
    }

    fn set_fill_color(&mut self, color: Color) {
        if self.pen.fill != color {
            self.pen.fill = color;
            self.push(Command::SetFillColor(color));
        }
    }

    fn set_stroke_color(&mut self, color: Color) {
        if self.pen.stroke != color {
            self.pen.stroke = color;
            self.push(Command::SetStrokeColor(color));
        }
    }

    fn set_line_width(&mut self, width: Pt) {
        let width = width.max(Pt::ZERO);
        if self.pen.line_width != width {
            self.pen.line_width = width;
            self.push(Command::SetLineWidth(width));
        }
    }

    fn draw_rect(&mut self, Rect { x, y, width, height }: Rect) {
        self.push(Command::DrawRect {
            x,
            y,
            width,
            height,
        });
    }

    fn fill_rect(&mut self, Rect { x, y, width, height }: Rect) {
        self.push(Command::FillRect {
            x,
            y,
            width,
            height,
        });
    }

    fn draw_text(&mut self, Rect { x, y, width, height }: Rect, align: TextAlign, text: &str) {
        self.push(Command::DrawText {
            x,
            y,
            width,
            height,
            align,
            text: text.to_string(),
        });
    }

    fn draw_image(&mut self, Rect { x, y, width, height }: Rect, resource_id: &str) {
        self.push(Command::DrawImage {
            x,
            y,
            width,
            height,
            resource_id: resource_id.to_string(),
        });
    }

    fn new_page(&mut self) {
        let closed = std::mem::replace(&mut self.page, Page::new());
        self.finished.push(closed);
        self.saved.clear();
        self.pen = Pen::default();
    }

    fn meta(&mut self, key: &str, value: &str) {
        self.push(Command::Meta {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
}
