// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod member;
pub mod principal;
pub mod shoot;

pub use member::Member;
pub use principal::{Principal, Role};
pub use shoot::{
    Actor, EditStatus, EditTrack, NewShoot, Scope, Shoot, ShootKind, ShootStatus, Transition,
    TransitionError,
};
