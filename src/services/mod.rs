// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod backend;
pub mod capture;
pub mod geometry;
pub mod pricing;
pub mod zones;

pub use backend::BackendClient;
pub use capture::{CaptureNotice, DrawAction, GeometryCapture, PendingShape};
pub use geometry::compute_centroid;
pub use pricing::{EditorState, SubmitState, ZonePricingTable};
pub use zones::ZoneRegistry;
