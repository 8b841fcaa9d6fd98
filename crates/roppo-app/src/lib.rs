// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod error;
pub mod ids;
pub mod model;
pub mod navigation;
pub mod report;
pub mod state;
pub mod view;

pub use error::*;
pub use ids::*;
pub use model::*;
pub use navigation::*;
pub use report::*;
pub use state::*;
pub use view::*;
