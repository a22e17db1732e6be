// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scoped edit-mode sessions.

use crate::error::Result;
use crate::host::SceneHost;

/// Runs `body` with the active object in edit mode.
///
/// A host that is already in edit mode is first returned to object mode so
/// the body always starts a fresh session. Object mode is restored on every
/// exit path, including when the body fails; the body's error wins over any
/// error from leaving edit mode.
pub fn with_edit_mode<H, T>(host: &mut H, body: impl FnOnce(&mut H) -> Result<T>) -> Result<T>
where
    H: SceneHost + ?Sized,
{
    if host.in_edit_mode() {
        tracing::debug!("Leaving stale edit session");
        host.toggle_edit_mode()?;
    }
    host.toggle_edit_mode()?;

    let result = body(host);
    let exit = if host.in_edit_mode() {
        host.toggle_edit_mode()
    } else {
        Ok(())
    };

    match (result, exit) {
        (Ok(value), Ok(())) => Ok(value),
        (Err(e), _) | (Ok(_), Err(e)) => Err(e),
    }
}
