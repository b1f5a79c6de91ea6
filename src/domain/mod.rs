//! Domain Layer
//!
//! The core of the toolbox: build-cycle bookkeeping, change debouncing and
//! the device registry, without I/O dependencies.
//!
//! ## Structure
//!
//! - `entities/` - Core domain entities (ChangeEvent, BuildCycle, Device)
//! - `value_objects/` - Immutable value types (DeployTarget, WatchState, IgnorePolicy)
//! - `services/` - Domain services (Debouncer, DeviceRegistry)
//! - `ports/` - Interface definitions for infrastructure
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never spawns processes or touches the network directly
//! 2. **Explicit time** - Services take `now` as a parameter
//! 3. **Ports & Adapters** - All I/O goes through trait-defined ports

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
