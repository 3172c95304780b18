#![forbid(unsafe_code)]

//! Host-independent page behavior controller.
//!
//! `pagectl-core` owns every piece of page state (theme flag, slide index,
//! audio transport, decorative bubbles, mobile menu, lazy images) and the
//! timers that mutate it. It never touches a DOM: the embedding host pushes
//! [`Action`]s and advances a deterministic clock, and the controller answers
//! with [`Effect`]s that the host applies through [`PageHost`].
//!
//! ```
//! use pagectl_core::testing::RecordingHost;
//! use pagectl_core::{Action, PageConfig, PageController, PageInventory};
//!
//! let inventory = PageInventory {
//!     slide_count: 3,
//!     dot_count: 3,
//!     ..PageInventory::default()
//! };
//! let mut page = PageController::with_seed(PageConfig::default(), inventory, RecordingHost::new(), 7);
//! page.init();
//! page.dispatch(Action::JumpToSlide(2));
//! assert_eq!(page.slide_index(), Some(2));
//! ```

pub mod action;
pub mod audio;
pub mod bubbles;
pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod lazy;
pub mod menu;
pub mod scheduler;
pub mod scroll;
pub mod slider;
pub mod testing;
pub mod theme;

pub use action::{Action, Effect, PlayIcon, PlayOrigin};
pub use config::PageConfig;
pub use controller::PageController;
pub use error::{ConfigError, PageError, Result};
pub use host::{PageHost, PageInventory};
pub use scheduler::{DeterministicClock, Scheduler, TimerId};
pub use theme::Theme;
