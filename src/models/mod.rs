// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for zones, zone prices and the backend wire format.

pub mod geometry;
pub mod service;
pub mod wire;
pub mod zone;
pub mod zone_price;

pub use geometry::{Coordinate, Ring};
pub use service::Service;
pub use wire::{ApiEnvelope, Status};
pub use zone::{Zone, ZoneRecord, ZoneSaveRequest};
pub use zone_price::{NamedRef, ZonePrice, ZonePriceForm};
