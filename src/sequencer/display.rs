// Display mode - Which fretboard layers are shown and how they combine
//
// Toggle precedence:
//   notes    on → upcoming off, fingers off     off → upcoming on
//   fingers  on → notes off, shape off
//   shape    on → fingers off, upcoming off (notes kept)
//   upcoming plain toggle

/// Layer drawn under the active notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Background {
    /// Every lesson position labelled with its fret number
    Notes,
    /// Every lesson position labelled with its step order
    Shape,
    /// Every lesson position labelled with its finger
    Fingers,
    None,
}

/// Label printed on an active marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActiveLabel {
    StepOrder,
    Finger,
    Fret,
    NoteName,
}

/// Combination of the four display toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayMode {
    notes: bool,
    fingers: bool,
    shape: bool,
    upcoming: bool,
}

impl Default for DisplayMode {
    fn default() -> Self {
        Self {
            notes: false,
            fingers: false,
            shape: false,
            upcoming: true,
        }
    }
}

impl DisplayMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_notes(&mut self) {
        self.notes = !self.notes;
        if self.notes {
            self.upcoming = false;
            self.fingers = false;
        } else {
            self.upcoming = true;
        }
    }

    pub fn toggle_fingers(&mut self) {
        self.fingers = !self.fingers;
        if self.fingers {
            self.notes = false;
            self.shape = false;
        }
    }

    pub fn toggle_shape(&mut self) {
        self.shape = !self.shape;
        if self.shape {
            self.fingers = false;
            self.upcoming = false;
        }
    }

    pub fn toggle_upcoming(&mut self) {
        self.upcoming = !self.upcoming;
    }

    pub fn shows_notes(&self) -> bool {
        self.notes
    }

    pub fn shows_fingers(&self) -> bool {
        self.fingers
    }

    pub fn shows_shape(&self) -> bool {
        self.shape
    }

    pub fn upcoming_enabled(&self) -> bool {
        self.upcoming
    }

    /// Upcoming layer is hidden under the notes and shape backgrounds
    pub fn needs_upcoming(&self) -> bool {
        self.upcoming && !self.notes && !self.shape
    }

    pub fn needs_sequence(&self) -> bool {
        self.notes || self.shape || self.fingers
    }

    pub fn background(&self) -> Background {
        if self.notes {
            Background::Notes
        } else if self.shape {
            Background::Shape
        } else if self.fingers {
            Background::Fingers
        } else {
            Background::None
        }
    }

    pub fn active_label(&self) -> ActiveLabel {
        if self.shape {
            ActiveLabel::StepOrder
        } else if self.fingers {
            ActiveLabel::Finger
        } else if self.notes {
            ActiveLabel::Fret
        } else {
            ActiveLabel::NoteName
        }
    }
}
