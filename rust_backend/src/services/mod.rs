//! Service layer: session orchestration and render requests.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (Python bindings, CLI)               │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer                                           │
//! │  - SessionCache (one open target at a time)              │
//! │  - TargetSession (pixel file → light curve → periodogram)│
//! │  - Render requests (view.rs)                             │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┼─────────────────┬──────────────┐
//!     │               │                 │              │
//! ┌───▼─────┐  ┌──────▼──────┐  ┌───────▼──────┐  ┌────▼────┐
//! │ Archive │  │ Photometry  │  │ Spectral     │  │ FAP     │
//! │         │  │             │  │ transform    │  │         │
//! └─────────┘  └─────────────┘  └──────────────┘  └─────────┘
//! ```

pub mod cache;
pub mod session;
pub mod view;

pub use cache::{SessionCache, SessionKey};
pub use session::{
    LightCurveOptions, LightCurveProduct, PeriodogramOptions, PeriodogramProduct, TargetSession,
};
pub use view::{DisplayOptions, LightCurveView, PeriodogramView, PixelFileView, Scale};
