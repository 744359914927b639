pub mod catalog;
pub mod inventory;
pub mod lifecycle;
pub mod reaper;
pub mod reservation;
pub mod views;

pub use catalog::CatalogService;
pub use lifecycle::LifecycleManager;
pub use reaper::{ExpiryReaper, ReaperHandle, ReaperStatus, SweepReport};
pub use reservation::ReservationEngine;
pub use views::ViewService;
