// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The info popup capability and a ready-made implementation.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Container-relative pixel coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Distance from the container's left edge.
    pub left: f64,
    /// Distance from the container's top edge.
    pub top: f64,
}

impl Position {
    /// A position at `(left, top)`.
    pub const fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

/// Something that can show station details next to a selection.
///
/// The map checks for a popup once, when it is registered, and otherwise
/// treats a missing popup as "every popup call is a no-op".
pub trait Popup {
    /// Show at `position`, relative to the map container.
    fn show(&mut self, position: Position);
    /// Hide.
    fn hide(&mut self);
    /// Whether the popup is currently shown.
    fn is_open(&self) -> bool;
}

// Lets a host keep a handle on the popup it gave to the map.
impl<P: Popup + ?Sized> Popup for Rc<RefCell<P>> {
    fn show(&mut self, position: Position) {
        self.borrow_mut().show(position);
    }

    fn hide(&mut self) {
        self.borrow_mut().hide();
    }

    fn is_open(&self) -> bool {
        self.borrow().is_open()
    }
}

/// CSS `display` of the info window.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Display {
    /// `display: none`
    #[default]
    Hidden,
    /// `display: block`
    Block,
}

/// Absolutely positioned info window.
///
/// Mirrors what a host has to apply to its own element: `left`/`top` in
/// pixels and `display`. A configured `offset` is added to every shown position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InfoPopup {
    offset: Position,
    display: Display,
    position: Option<Position>,
}

impl InfoPopup {
    /// A hidden popup with the given offset.
    pub fn new(offset: Position) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    /// Current `display`.
    pub fn display(&self) -> Display {
        self.display
    }

    /// Last position applied, offset included.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// The configured offset.
    pub fn offset(&self) -> Position {
        self.offset
    }

    /// Inline style for the host element, e.g. `position:absolute;left:12px;top:30px;display:block`.
    pub fn css(&self) -> String {
        let display = match self.display {
            Display::Hidden => "none",
            Display::Block => "block",
        };
        match self.position {
            Some(p) => format!(
                "position:absolute;left:{}px;top:{}px;display:{display}",
                p.left, p.top
            ),
            None => format!("position:absolute;display:{display}"),
        }
    }
}

impl Popup for InfoPopup {
    fn show(&mut self, position: Position) {
        self.position = Some(Position::new(
            position.left + self.offset.left,
            position.top + self.offset.top,
        ));
        self.display = Display::Block;
    }

    fn hide(&mut self) {
        self.display = Display::Hidden;
    }

    fn is_open(&self) -> bool {
        self.display == Display::Block
    }
}
