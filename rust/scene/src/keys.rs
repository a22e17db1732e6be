// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key types for arena-based object storage.
//!
//! Keys are created by `slotmap::SlotMap` and stay valid while their object
//! lives. They are an in-process handle only: names are the stable identity
//! across scene documents and runs.

use slotmap::new_key_type;

new_key_type! {
    /// Key for an object in a [`Scene`](crate::Scene).
    pub struct ObjectKey;
}
