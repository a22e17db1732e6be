// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Downward traversal of the object hierarchy.

use crate::arena::Scene;
use crate::error::Result;
use crate::keys::ObjectKey;

impl Scene {
    /// All descendants of an object, depth-first, siblings in name order.
    pub fn descendants(&self, key: ObjectKey) -> Vec<ObjectKey> {
        let mut out = Vec::new();
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            let mut kids = self.children(current).to_vec();
            // Reverse name order so the stack pops them alphabetically.
            kids.sort_by(|a, b| self.objects[*b].name.cmp(&self.objects[*a].name));
            for &kid in &kids {
                stack.push(kid);
            }
            if current != key {
                out.push(current);
            }
        }
        out
    }

    /// Names of every mesh object below `root`, direct and nested.
    pub fn mesh_descendants(&self, root: &str) -> Result<Vec<String>> {
        let key = self.require(root)?;
        Ok(self
            .descendants(key)
            .into_iter()
            .filter_map(|k| {
                let object = &self.objects[k];
                object.is_mesh().then(|| object.name.clone())
            })
            .collect())
    }

    /// Iterates objects parents-first, roots in name order.
    pub fn hierarchy_order(&self) -> Vec<ObjectKey> {
        let mut roots: Vec<ObjectKey> = self.roots().collect();
        roots.sort_by(|a, b| self.objects[*a].name.cmp(&self.objects[*b].name));
        roots
            .into_iter()
            .flat_map(|root| std::iter::once(root).chain(self.descendants(root)))
            .collect()
    }
}
