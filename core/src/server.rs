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

use crate::config::Config;
use crate::message::{Message, PrefixParams, RouteParams};
use crate::net::Ipv4Net;
use crate::peer::{Inbound, NeighborTable};
use crate::policy::should_export;
use crate::rib::{ForwardingTable, Journal, Route};
use crate::{debug, info, warn};
use serde_json::json;
use std::io;
use std::net::Ipv4Addr;
use tokio::sync::mpsc;

/// Errors that can occur while bringing the router up.
#[derive(Debug)]
pub enum RouterError {
    Socket(io::Error),
}

impl std::fmt::Display for RouterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterError::Socket(e) => write!(f, "failed to open neighbor socket: {}", e),
        }
    }
}

impl std::error::Error for RouterError {}

/// The router: neighbor registry, forwarding table and update journal,
/// owned by the single event-loop task. Handlers take `&mut self`; nothing
/// else touches the routing state.
pub struct Router {
    asn: u32,
    neighbors: NeighborTable,
    table: ForwardingTable,
    journal: Journal,
    inbound_rx: mpsc::UnboundedReceiver<Inbound>,
}

impl Router {
    pub async fn new(config: Config) -> Result<Self, RouterError> {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let neighbors = NeighborTable::connect(&config.neighbors, inbound_tx)
            .await
            .map_err(RouterError::Socket)?;

        for cfg in &config.neighbors {
            info!("configured neighbor",
                "peer" => cfg.addr.to_string(),
                "port" => cfg.port,
                "relation" => format!("{:?}", cfg.relation)
            );
        }

        Ok(Router {
            asn: config.asn,
            neighbors,
            table: ForwardingTable::new(),
            journal: Journal::new(),
            inbound_rx,
        })
    }

    /// Greet every neighbor, then process datagrams until all sockets are
    /// gone. Each datagram is handled to completion before the next one.
    pub async fn run(mut self) {
        for neighbor in self.neighbors.iter() {
            let hello = Message::Handshake {
                src: neighbor.ifaddr(),
                dst: neighbor.addr,
                msg: json!({}),
            };
            neighbor.send(&hello).await;
            debug!("sent handshake", "peer" => neighbor.addr.to_string());
        }
        info!("router running", "asn" => self.asn, "neighbors" => self.neighbors.len());

        while let Some((srcif, datagram)) = self.inbound_rx.recv().await {
            self.dispatch(srcif, &datagram).await;
        }
    }

    async fn dispatch(&mut self, srcif: Ipv4Addr, datagram: &[u8]) {
        let msg = match Message::from_slice(datagram) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("dropping unparseable message",
                    "peer" => srcif.to_string(),
                    "error" => e.to_string()
                );
                return;
            }
        };

        match msg {
            Message::Update { msg: params, .. } => self.handle_update(srcif, params).await,
            Message::Withdraw { src, msg: prefixes, .. } => {
                self.handle_withdraw(src, prefixes).await
            }
            data @ Message::Data { .. } => self.handle_data(srcif, data).await,
            Message::Dump { src, .. } => self.handle_dump(srcif, src).await,
            other => {
                debug!("ignoring message",
                    "peer" => srcif.to_string(),
                    "type" => type_name(&other)
                );
            }
        }
    }

    /// Accept an announcement: learn the route, journal it, re-advertise
    /// under the export policy, then aggregate.
    async fn handle_update(&mut self, srcif: Ipv4Addr, params: RouteParams) {
        let Some(from_relation) = self.neighbors.relation(srcif) else {
            warn!("update from unknown neighbor", "peer" => srcif.to_string());
            return;
        };
        let Some(route) = Route::from_announcement(&params, srcif) else {
            warn!("dropping update with missing attributes",
                "peer" => srcif.to_string(),
                "network" => params.network.to_string()
            );
            return;
        };

        info!("route announced",
            "prefix" => route.prefix.to_string(),
            "peer" => srcif.to_string()
        );
        self.table.insert(route.clone());
        self.journal.record(route);

        // Propagated form: public fields only, our ASN prepended.
        let mut as_path = Vec::with_capacity(params.as_path.len() + 1);
        as_path.push(self.asn);
        as_path.extend_from_slice(&params.as_path);

        for neighbor in self.neighbors.iter().filter(|n| n.addr != srcif) {
            if !should_export(from_relation, neighbor.relation) {
                continue;
            }
            let update = Message::Update {
                src: neighbor.ifaddr(),
                dst: neighbor.addr,
                msg: RouteParams {
                    network: params.network,
                    netmask: params.netmask,
                    localpref: None,
                    as_path: as_path.clone(),
                    origin: None,
                    self_origin: None,
                },
            };
            neighbor.send(&update).await;
            debug!("propagated update", "peer" => neighbor.addr.to_string());
        }

        self.table.aggregate();
    }

    /// Revoke routes: propagate the withdrawal, scrub table and journal,
    /// then replay the journal so stale aggregates come apart.
    async fn handle_withdraw(&mut self, src: Ipv4Addr, prefixes: Vec<PrefixParams>) {
        let Some(from_relation) = self.neighbors.relation(src) else {
            warn!("withdraw from unknown neighbor", "peer" => src.to_string());
            return;
        };

        for neighbor in self.neighbors.iter().filter(|n| n.addr != src) {
            if !should_export(from_relation, neighbor.relation) {
                continue;
            }
            let withdraw = Message::Withdraw {
                src: neighbor.ifaddr(),
                dst: neighbor.addr,
                msg: prefixes.clone(),
            };
            neighbor.send(&withdraw).await;
            debug!("propagated withdraw", "peer" => neighbor.addr.to_string());
        }

        for entry in &prefixes {
            let prefix = Ipv4Net::new(entry.network, entry.netmask);
            self.table.remove(prefix, src);
            self.journal.withdraw(src, prefix);
            info!("route withdrawn",
                "prefix" => prefix.to_string(),
                "peer" => src.to_string()
            );
        }

        self.table.rebuild(&self.journal);
    }

    /// Forward a data packet along the best route, if policy lets traffic
    /// from the arrival interface transit toward it.
    async fn handle_data(&mut self, srcif: Ipv4Addr, data: Message) {
        let Message::Data { src, dst, .. } = &data else {
            return;
        };
        let (src, dst) = (*src, *dst);

        let Some(best_peer) = self.table.best_route(dst).map(|r| r.peer) else {
            debug!("no route", "dst" => dst.to_string());
            self.send_no_route(srcif, src).await;
            return;
        };

        let from_relation = self.neighbors.relation(srcif);
        let to_relation = self.neighbors.relation(best_peer);
        let allowed = matches!(
            (from_relation, to_relation),
            (Some(from), Some(to)) if should_export(from, to)
        );
        if !allowed {
            debug!("forwarding denied by policy",
                "dst" => dst.to_string(),
                "peer" => best_peer.to_string()
            );
            self.send_no_route(srcif, src).await;
            return;
        }

        if let Some(neighbor) = self.neighbors.get(best_peer) {
            debug!("forwarding data", "dst" => dst.to_string(), "peer" => best_peer.to_string());
            neighbor.send(&data).await;
        }
    }

    async fn send_no_route(&self, srcif: Ipv4Addr, origin: Ipv4Addr) {
        let Some(neighbor) = self.neighbors.get(srcif) else {
            return;
        };
        let reply = Message::NoRoute {
            src: neighbor.ifaddr(),
            dst: origin,
            msg: json!({}),
        };
        neighbor.send(&reply).await;
    }

    /// Operator table dump: aggregate, then reply with every route.
    async fn handle_dump(&mut self, srcif: Ipv4Addr, requester: Ipv4Addr) {
        self.table.aggregate();

        let Some(neighbor) = self.neighbors.get(srcif) else {
            return;
        };
        let reply = Message::Table {
            src: neighbor.ifaddr(),
            dst: requester,
            msg: self
                .table
                .all_routes()
                .iter()
                .map(Route::to_table_route)
                .collect(),
        };
        neighbor.send(&reply).await;
        info!("table dumped", "routes" => self.table.len(), "peer" => srcif.to_string());
    }
}

fn type_name(msg: &Message) -> &'static str {
    match msg {
        Message::Handshake { .. } => "handshake",
        Message::Update { .. } => "update",
        Message::Withdraw { .. } => "withdraw",
        Message::Data { .. } => "data",
        Message::Dump { .. } => "dump",
        Message::Table { .. } => "table",
        Message::NoRoute { .. } => "no route",
    }
}
