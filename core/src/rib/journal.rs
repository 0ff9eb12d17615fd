// Copyright 2025 pathvector Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::net::Ipv4Net;
use crate::rib::Route;
use std::net::Ipv4Addr;

/// Ordered log of accepted announcements, in arrival order. Each entry is
/// the route as learned, with `peer` naming the neighbor it arrived from.
///
/// The journal is the source of truth the forwarding table is rebuilt from
/// after a withdrawal, which is what makes aggregated prefixes come apart
/// again when one of their constituents is revoked.
#[derive(Debug, Default)]
pub struct Journal {
    entries: Vec<Route>,
}

impl Journal {
    pub fn new() -> Self {
        Journal::default()
    }

    /// Append an accepted announcement.
    pub fn record(&mut self, route: Route) {
        self.entries.push(route);
    }

    /// Drop every entry learned from `src` for exactly this prefix.
    /// Returns the number of entries removed.
    pub fn withdraw(&mut self, src: Ipv4Addr, prefix: Ipv4Net) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|e| !(e.peer == src && e.prefix == prefix));
        before - self.entries.len()
    }

    pub fn entries(&self) -> &[Route] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
