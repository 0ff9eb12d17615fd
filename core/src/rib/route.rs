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

use crate::message::{Origin, RouteParams, TableRoute};
use crate::net::Ipv4Net;
use std::cmp::Ordering;
use std::net::Ipv4Addr;

/// Path attributes carried by an announcement. Aggregation matches on all
/// four; the learning peer is deliberately not part of this set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteAttrs {
    pub local_pref: u32,
    pub as_path: Vec<u32>,
    pub origin: Origin,
    pub self_origin: bool,
}

/// A candidate route: a prefix, its attributes and the neighbor it was
/// learned from (which is also where matching traffic forwards).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    pub prefix: Ipv4Net,
    pub peer: Ipv4Addr,
    pub attrs: RouteAttrs,
}

impl Route {
    /// Build a Route from an accepted announcement. Returns None when any
    /// of the private attributes is missing, which rejects the propagated
    /// three-field form at the dispatch edge.
    pub fn from_announcement(params: &RouteParams, peer: Ipv4Addr) -> Option<Self> {
        Some(Route {
            prefix: Ipv4Net::new(params.network, params.netmask),
            peer,
            attrs: RouteAttrs {
                local_pref: params.localpref?,
                as_path: params.as_path.clone(),
                origin: params.origin?,
                self_origin: params.self_origin?,
            },
        })
    }

    pub fn to_table_route(&self) -> TableRoute {
        TableRoute {
            network: self.prefix.network,
            netmask: self.prefix.netmask,
            peer: self.peer,
            localpref: self.attrs.local_pref,
            as_path: self.attrs.as_path.clone(),
            origin: self.attrs.origin,
            self_origin: self.attrs.self_origin,
        }
    }
}

impl PartialOrd for Route {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Route {
    /// Compare candidate routes for best-path selection.
    /// Returns `Ordering::Greater` if self is better (higher preference).
    fn cmp(&self, other: &Self) -> Ordering {
        // Step 1: Prefer the most specific prefix (longest match)
        match self
            .prefix
            .prefix_length()
            .cmp(&other.prefix.prefix_length())
        {
            Ordering::Greater => return Ordering::Greater,
            Ordering::Less => return Ordering::Less,
            Ordering::Equal => {}
        }

        // Step 2: Prefer the route with the highest local preference
        match self.attrs.local_pref.cmp(&other.attrs.local_pref) {
            Ordering::Greater => return Ordering::Greater,
            Ordering::Less => return Ordering::Less,
            Ordering::Equal => {}
        }

        // Step 3: Prefer self-originated routes
        match (self.attrs.self_origin, other.attrs.self_origin) {
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => {}
        }

        // Step 4: Prefer the route with the shortest AS path
        match other.attrs.as_path.len().cmp(&self.attrs.as_path.len()) {
            Ordering::Greater => return Ordering::Greater,
            Ordering::Less => return Ordering::Less,
            Ordering::Equal => {}
        }

        // Step 5: Prefer the lowest origin type (IGP < EGP < UNK)
        match (other.attrs.origin as u8).cmp(&(self.attrs.origin as u8)) {
            Ordering::Greater => return Ordering::Greater,
            Ordering::Less => return Ordering::Less,
            Ordering::Equal => {}
        }

        // Step 6: Prefer the numerically lowest peer address
        u32::from(other.peer).cmp(&u32::from(self.peer))
    }
}
