//! Mouse action sinks
//!
//! The classifier emits cursor and button actions through the [`ActionSink`]
//! trait so the state machine stays decoupled from the OS injection backend.
//! Production uses [`EnigoSink`]; `--dry-run` swaps in [`LogSink`] which only
//! logs what would have been injected.

use anyhow::{Context, Result};
use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};
use tracing::{debug, info};

/// Sink for mouse actions produced by the gesture classifier
///
/// Implementations are driven from a single task, so methods take `&mut self`
/// and no interior mutability is needed.
pub trait ActionSink: Send {
    /// Move the cursor to absolute screen coordinates
    fn move_to(&mut self, x: i32, y: i32) -> Result<()>;

    /// Press and hold the left button (drag start)
    fn mouse_down(&mut self) -> Result<()>;

    /// Release the left button (drag end)
    fn mouse_up(&mut self) -> Result<()>;

    /// Single left click
    fn click(&mut self) -> Result<()>;

    /// Single right click
    fn right_click(&mut self) -> Result<()>;

    /// Size of the display the cursor is mapped onto
    fn screen_size(&self) -> (u32, u32);
}

/// Production sink backed by the enigo input library
pub struct EnigoSink {
    enigo: Enigo,
    screen: (u32, u32),
}

impl EnigoSink {
    /// Connect to the OS input backend and query the main display size
    pub fn new() -> Result<Self> {
        let enigo =
            Enigo::new(&Settings::default()).context("failed to initialize input backend")?;
        let (width, height) = enigo
            .main_display()
            .context("failed to query main display size")?;
        Ok(Self {
            enigo,
            screen: (width.max(0) as u32, height.max(0) as u32),
        })
    }
}

impl ActionSink for EnigoSink {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .context("cursor move failed")
    }

    fn mouse_down(&mut self) -> Result<()> {
        self.enigo
            .button(Button::Left, Direction::Press)
            .context("left button press failed")
    }

    fn mouse_up(&mut self) -> Result<()> {
        self.enigo
            .button(Button::Left, Direction::Release)
            .context("left button release failed")
    }

    fn click(&mut self) -> Result<()> {
        self.enigo
            .button(Button::Left, Direction::Click)
            .context("left click failed")
    }

    fn right_click(&mut self) -> Result<()> {
        self.enigo
            .button(Button::Right, Direction::Click)
            .context("right click failed")
    }

    fn screen_size(&self) -> (u32, u32) {
        self.screen
    }
}

/// Dry-run sink that logs actions instead of injecting them
///
/// Useful for validating gesture recognition without moving the real cursor.
pub struct LogSink {
    screen: (u32, u32),
    action_count: u64,
}

impl LogSink {
    /// Screen size assumed when no display is queried (dry-run only)
    const DEFAULT_SCREEN: (u32, u32) = (1920, 1080);

    pub fn new() -> Self {
        Self {
            screen: Self::DEFAULT_SCREEN,
            action_count: 0,
        }
    }

    fn record(&mut self, action: &str) {
        self.action_count += 1;
        info!("🖱️  [dry-run] {} [action #{}]", action, self.action_count);
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionSink for LogSink {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        // Moves fire every frame; keep them out of the info log
        debug!("🖱️  [dry-run] move to ({}, {})", x, y);
        Ok(())
    }

    fn mouse_down(&mut self) -> Result<()> {
        self.record("left button down");
        Ok(())
    }

    fn mouse_up(&mut self) -> Result<()> {
        self.record("left button up");
        Ok(())
    }

    fn click(&mut self) -> Result<()> {
        self.record("left click");
        Ok(())
    }

    fn right_click(&mut self) -> Result<()> {
        self.record("right click");
        Ok(())
    }

    fn screen_size(&self) -> (u32, u32) {
        self.screen
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    /// Actions captured by [`RecordingSink`] for assertions
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum MouseAction {
        MoveTo(i32, i32),
        MouseDown,
        MouseUp,
        Click,
        RightClick,
    }

    /// Test sink that records every action in order
    #[derive(Default)]
    pub struct RecordingSink {
        pub actions: Vec<MouseAction>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn count_of(&self, action: MouseAction) -> usize {
            self.actions.iter().filter(|a| **a == action).count()
        }

        pub fn moves(&self) -> Vec<(i32, i32)> {
            self.actions
                .iter()
                .filter_map(|a| match a {
                    MouseAction::MoveTo(x, y) => Some((*x, *y)),
                    _ => None,
                })
                .collect()
        }
    }

    impl ActionSink for RecordingSink {
        fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
            self.actions.push(MouseAction::MoveTo(x, y));
            Ok(())
        }

        fn mouse_down(&mut self) -> Result<()> {
            self.actions.push(MouseAction::MouseDown);
            Ok(())
        }

        fn mouse_up(&mut self) -> Result<()> {
            self.actions.push(MouseAction::MouseUp);
            Ok(())
        }

        fn click(&mut self) -> Result<()> {
            self.actions.push(MouseAction::Click);
            Ok(())
        }

        fn right_click(&mut self) -> Result<()> {
            self.actions.push(MouseAction::RightClick);
            Ok(())
        }

        fn screen_size(&self) -> (u32, u32) {
            (1920, 1080)
        }
    }
}
