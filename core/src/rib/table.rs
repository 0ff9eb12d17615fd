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
use crate::rib::{Journal, Route};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::net::Ipv4Addr;

/// The forwarding table: per-prefix candidate routes, at most one per peer.
#[derive(Debug, Default)]
pub struct ForwardingTable {
    routes: HashMap<Ipv4Net, Vec<Route>>,
}

impl ForwardingTable {
    pub fn new() -> Self {
        ForwardingTable::default()
    }

    /// Insert a candidate route. A re-announcement from the same peer for
    /// the same prefix replaces the previous candidate.
    pub fn insert(&mut self, route: Route) {
        match self.routes.entry(route.prefix) {
            Entry::Occupied(mut entry) => {
                let candidates = entry.get_mut();
                if let Some(existing) = candidates.iter_mut().find(|r| r.peer == route.peer) {
                    *existing = route;
                } else {
                    candidates.push(route);
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(vec![route]);
            }
        }
    }

    /// Remove the candidate learned from `peer` under exactly this key.
    /// Returns true if a route was actually removed.
    pub fn remove(&mut self, prefix: Ipv4Net, peer: Ipv4Addr) -> bool {
        let Some(candidates) = self.routes.get_mut(&prefix) else {
            return false;
        };
        let had_route = candidates.iter().any(|r| r.peer == peer);
        candidates.retain(|r| r.peer != peer);
        if candidates.is_empty() {
            self.routes.remove(&prefix);
        }
        had_route
    }

    /// Every candidate whose prefix contains `dst`, across all key lengths.
    pub fn candidates(&self, dst: Ipv4Addr) -> Vec<&Route> {
        self.routes
            .iter()
            .filter(|(prefix, _)| prefix.contains(dst))
            .flat_map(|(_, candidates)| candidates.iter())
            .collect()
    }

    /// Best route toward `dst` under the decision order, if any prefix
    /// covers it.
    pub fn best_route(&self, dst: Ipv4Addr) -> Option<&Route> {
        self.candidates(dst).into_iter().max()
    }

    /// Flatten to a list sorted by (network, netmask) for dumps and tests.
    pub fn all_routes(&self) -> Vec<Route> {
        let mut routes: Vec<Route> = self.routes.values().flatten().cloned().collect();
        routes.sort_by_key(sort_key);
        routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterative pairwise aggregation: adjacent equal-mask prefixes whose
    /// attributes match collapse into the covering prefix, keeping the
    /// first constituent's peer. Passes repeat until a full scan merges
    /// nothing.
    pub fn aggregate(&mut self) {
        let mut routes: Vec<Route> = self.routes.values().flatten().cloned().collect();

        loop {
            routes.sort_by_key(sort_key);

            let mut scanned = Vec::with_capacity(routes.len());
            let mut merged_any = false;
            let mut i = 0;
            while i < routes.len() {
                if i + 1 < routes.len() && mergeable(&routes[i], &routes[i + 1]) {
                    scanned.push(merge_pair(&routes[i], &routes[i + 1]));
                    merged_any = true;
                    i += 2;
                } else {
                    scanned.push(routes[i].clone());
                    i += 1;
                }
            }
            routes = scanned;

            if !merged_any {
                break;
            }
        }

        self.routes.clear();
        for route in routes {
            self.insert(route);
        }
    }

    /// Rebuild from the journal: replay each surviving announcement the way
    /// it was originally accepted (insert, then aggregate). This is what
    /// dis-aggregates prefixes whose constituents were withdrawn.
    pub fn rebuild(&mut self, journal: &Journal) {
        self.routes.clear();
        for route in journal.entries() {
            self.insert(route.clone());
            self.aggregate();
        }
    }
}

fn sort_key(route: &Route) -> (u32, u32) {
    (
        u32::from(route.prefix.network),
        u32::from(route.prefix.netmask),
    )
}

fn mergeable(a: &Route, b: &Route) -> bool {
    a.attrs == b.attrs && a.prefix.is_adjacent(&b.prefix)
}

fn merge_pair(a: &Route, b: &Route) -> Route {
    Route {
        prefix: a.prefix.merge(&b.prefix),
        peer: a.peer,
        attrs: a.attrs.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Origin;
    use crate::test_helpers::{make_route, make_route_with, prefix};

    fn table_with(routes: Vec<Route>) -> ForwardingTable {
        let mut table = ForwardingTable::new();
        for route in routes {
            table.insert(route);
        }
        table
    }

    #[test]
    fn test_insert_same_peer_overwrites() {
        let mut table = table_with(vec![make_route("10.0.0.0", "255.255.255.0", "192.0.2.2")]);
        table.insert(make_route_with("10.0.0.0", "255.255.255.0", "192.0.2.2", |r| {
            r.attrs.local_pref = 42;
        }));

        let routes = table.all_routes();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].attrs.local_pref, 42);
    }

    #[test]
    fn test_insert_distinct_peers_coexist() {
        let table = table_with(vec![
            make_route("10.0.0.0", "255.255.255.0", "192.0.2.2"),
            make_route("10.0.0.0", "255.255.255.0", "198.51.100.2"),
        ]);

        assert_eq!(table.len(), 1);
        assert_eq!(table.all_routes().len(), 2);
    }

    #[test]
    fn test_remove_is_scoped_to_peer_and_key() {
        let mut table = table_with(vec![
            make_route("10.0.0.0", "255.255.255.0", "192.0.2.2"),
            make_route("10.0.0.0", "255.255.255.0", "198.51.100.2"),
        ]);

        assert!(table.remove(prefix("10.0.0.0", "255.255.255.0"), "192.0.2.2".parse().unwrap()));
        let routes = table.all_routes();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].peer, "198.51.100.2".parse::<Ipv4Addr>().unwrap());

        // Nothing left from that peer; key survives for the other peer
        assert!(!table.remove(prefix("10.0.0.0", "255.255.255.0"), "192.0.2.2".parse().unwrap()));

        // Removing the last candidate drops the key entirely
        assert!(table.remove(prefix("10.0.0.0", "255.255.255.0"), "198.51.100.2".parse().unwrap()));
        assert!(table.is_empty());
    }

    #[test]
    fn test_longest_prefix_match() {
        let table = table_with(vec![
            make_route("10.0.0.0", "255.0.0.0", "192.0.2.2"),
            make_route("10.1.0.0", "255.255.0.0", "198.51.100.2"),
        ]);

        let best = table.best_route("10.1.2.3".parse().unwrap()).unwrap();
        assert_eq!(best.peer, "198.51.100.2".parse::<Ipv4Addr>().unwrap());

        // An address outside the /16 falls back to the /8
        let best = table.best_route("10.2.2.3".parse().unwrap()).unwrap();
        assert_eq!(best.peer, "192.0.2.2".parse::<Ipv4Addr>().unwrap());

        assert!(table.best_route("172.16.0.1".parse().unwrap()).is_none());
    }

    #[test]
    fn test_local_pref_tiebreak() {
        let table = table_with(vec![
            make_route_with("10.0.0.0", "255.255.255.0", "192.0.2.2", |r| {
                r.attrs.local_pref = 100;
            }),
            make_route_with("10.0.0.0", "255.255.255.0", "198.51.100.2", |r| {
                r.attrs.local_pref = 200;
            }),
        ]);

        let best = table.best_route("10.0.0.7".parse().unwrap()).unwrap();
        assert_eq!(best.peer, "198.51.100.2".parse::<Ipv4Addr>().unwrap());
    }

    #[test]
    fn test_aggregate_adjacent_equal_attrs() {
        let mut table = table_with(vec![
            make_route("192.168.0.0", "255.255.255.0", "192.0.2.2"),
            make_route("192.168.1.0", "255.255.255.0", "192.0.2.2"),
        ]);

        table.aggregate();

        let routes = table.all_routes();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].prefix, prefix("192.168.0.0", "255.255.254.0"));
        assert_eq!(routes[0].peer, "192.0.2.2".parse::<Ipv4Addr>().unwrap());
    }

    #[test]
    fn test_aggregate_cascades() {
        // Four adjacent /24s with equal attributes collapse to one /22
        let mut table = table_with(vec![
            make_route("192.168.0.0", "255.255.255.0", "192.0.2.2"),
            make_route("192.168.1.0", "255.255.255.0", "192.0.2.2"),
            make_route("192.168.2.0", "255.255.255.0", "192.0.2.2"),
            make_route("192.168.3.0", "255.255.255.0", "192.0.2.2"),
        ]);

        table.aggregate();

        let routes = table.all_routes();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].prefix, prefix("192.168.0.0", "255.255.252.0"));
    }

    #[test]
    fn test_aggregate_requires_equal_attrs() {
        let tests = [
            (
                make_route_with("192.168.1.0", "255.255.255.0", "192.0.2.2", |r| {
                    r.attrs.local_pref = 50;
                }),
                "different localpref",
            ),
            (
                make_route_with("192.168.1.0", "255.255.255.0", "192.0.2.2", |r| {
                    r.attrs.origin = Origin::UNK;
                }),
                "different origin",
            ),
            (
                make_route_with("192.168.1.0", "255.255.255.0", "192.0.2.2", |r| {
                    r.attrs.as_path = vec![2, 9];
                }),
                "different AS path",
            ),
            (
                make_route_with("192.168.1.0", "255.255.255.0", "192.0.2.2", |r| {
                    r.attrs.self_origin = true;
                }),
                "different self origin",
            ),
            (
                make_route("192.168.2.0", "255.255.255.0", "192.0.2.2"),
                "not adjacent",
            ),
        ];

        for (other, name) in tests {
            let mut table = table_with(vec![
                make_route("192.168.0.0", "255.255.255.0", "192.0.2.2"),
                other,
            ]);
            table.aggregate();
            assert_eq!(table.len(), 2, "test case: {}", name);
        }
    }

    #[test]
    fn test_aggregate_ignores_peer() {
        // Identical attributes from different peers still merge; the
        // merged route keeps the first constituent's peer.
        let mut table = table_with(vec![
            make_route("192.168.0.0", "255.255.255.0", "192.0.2.2"),
            make_route("192.168.1.0", "255.255.255.0", "198.51.100.2"),
        ]);

        table.aggregate();

        let routes = table.all_routes();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].prefix, prefix("192.168.0.0", "255.255.254.0"));
        assert_eq!(routes[0].peer, "192.0.2.2".parse::<Ipv4Addr>().unwrap());
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let mut table = table_with(vec![
            make_route("192.168.0.0", "255.255.255.0", "192.0.2.2"),
            make_route("192.168.1.0", "255.255.255.0", "192.0.2.2"),
            make_route("10.0.0.0", "255.0.0.0", "198.51.100.2"),
        ]);

        table.aggregate();
        let once = table.all_routes();
        table.aggregate();
        assert_eq!(table.all_routes(), once);
    }

    #[test]
    fn test_aggregate_preserves_reachability() {
        let mut table = table_with(vec![
            make_route("192.168.0.0", "255.255.255.0", "192.0.2.2"),
            make_route("192.168.1.0", "255.255.255.0", "192.0.2.2"),
        ]);

        let before = table.best_route("192.168.1.5".parse().unwrap()).unwrap().clone();
        table.aggregate();
        let after = table.best_route("192.168.1.5".parse().unwrap()).unwrap();
        assert_eq!(after.attrs, before.attrs);
        assert!(after.prefix.prefix_length() <= before.prefix.prefix_length());
    }

    #[test]
    fn test_rebuild_disaggregates_after_withdrawal() {
        let peer: Ipv4Addr = "192.0.2.2".parse().unwrap();
        let mut journal = Journal::new();
        journal.record(make_route("192.168.0.0", "255.255.255.0", "192.0.2.2"));
        journal.record(make_route("192.168.1.0", "255.255.255.0", "192.0.2.2"));

        let mut table = ForwardingTable::new();
        table.rebuild(&journal);
        assert_eq!(table.all_routes().len(), 1, "aggregated while intact");

        // Revoke one constituent and replay
        journal.withdraw(peer, prefix("192.168.1.0", "255.255.255.0"));
        table.remove(prefix("192.168.1.0", "255.255.255.0"), peer);
        table.rebuild(&journal);

        let routes = table.all_routes();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].prefix, prefix("192.168.0.0", "255.255.255.0"));
        assert!(table.best_route("192.168.1.5".parse().unwrap()).is_none());
    }

    #[test]
    fn test_table_matches_journal_after_churn() {
        // The covered (dst, peer) pairs in the table equal what the journal
        // implies, through announce/withdraw/rebuild cycles.
        let peer_a: Ipv4Addr = "192.0.2.2".parse().unwrap();
        let mut journal = Journal::new();
        let mut table = ForwardingTable::new();

        for (network, mask, peer) in [
            ("10.0.0.0", "255.255.255.0", "192.0.2.2"),
            ("10.0.1.0", "255.255.255.0", "192.0.2.2"),
            ("10.0.1.0", "255.255.255.0", "198.51.100.2"),
        ] {
            let route = make_route(network, mask, peer);
            table.insert(route.clone());
            journal.record(route);
            table.aggregate();
        }

        journal.withdraw(peer_a, prefix("10.0.0.0", "255.255.255.0"));
        table.remove(prefix("10.0.0.0", "255.255.255.0"), peer_a);
        table.rebuild(&journal);

        // 10.0.0.x is only reachable via the surviving journal entries
        assert!(table.best_route("10.0.0.5".parse().unwrap()).is_none());
        let candidates = table.candidates("10.0.1.5".parse().unwrap());
        assert_eq!(candidates.len(), 2);
    }
}
