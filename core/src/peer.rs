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

use crate::config::NeighborConfig;
use crate::message::Message;
use crate::{debug, error, warn};
use std::collections::HashMap;
use std::io;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

/// Commercial relationship with a neighbor, controls the export policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// The neighbor pays us for transit
    Customer,
    /// Settlement-free exchange
    Peer,
    /// We pay the neighbor for transit
    Provider,
}

impl Relation {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "cust" => Ok(Relation::Customer),
            "peer" => Ok(Relation::Peer),
            "prov" => Ok(Relation::Provider),
            _ => Err(format!("Invalid relation: {}", s)),
        }
    }
}

/// A datagram received from a neighbor, tagged with its identifier.
pub type Inbound = (Ipv4Addr, Vec<u8>);

/// A configured neighbor session: logical address, relation and the
/// connected UDP socket toward its simulated endpoint.
pub struct Neighbor {
    pub addr: Ipv4Addr,
    pub relation: Relation,
    sock: Arc<UdpSocket>,
}

impl Neighbor {
    /// Local-side address on the interface toward this neighbor: the
    /// neighbor's address with the last octet replaced by 1.
    pub fn ifaddr(&self) -> Ipv4Addr {
        let o = self.addr.octets();
        Ipv4Addr::new(o[0], o[1], o[2], 1)
    }

    /// Fire-and-forget datagram write toward the neighbor.
    pub async fn send(&self, msg: &Message) {
        let bytes = match msg.to_vec() {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("failed to encode message", "peer" => self.addr.to_string(), "error" => e.to_string());
                return;
            }
        };
        if let Err(e) = self.sock.send(&bytes).await {
            error!("failed to send to peer", "peer" => self.addr.to_string(), "error" => e.to_string());
        }
    }
}

/// The neighbor registry, fixed at startup. Owns one connected socket per
/// neighbor; a reader task per socket funnels datagrams into the router's
/// single inbound channel.
pub struct NeighborTable {
    neighbors: HashMap<Ipv4Addr, Neighbor>,
}

impl NeighborTable {
    /// Bind an ephemeral localhost socket per neighbor, connect it to the
    /// neighbor's simulated port and spawn its reader task.
    pub async fn connect(
        configs: &[NeighborConfig],
        inbound_tx: mpsc::UnboundedSender<Inbound>,
    ) -> io::Result<Self> {
        let mut neighbors = HashMap::new();

        for cfg in configs {
            let sock = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await?;
            sock.connect((Ipv4Addr::LOCALHOST, cfg.port)).await?;
            let sock = Arc::new(sock);

            spawn_reader(cfg.addr, Arc::clone(&sock), inbound_tx.clone());

            neighbors.insert(
                cfg.addr,
                Neighbor {
                    addr: cfg.addr,
                    relation: cfg.relation,
                    sock,
                },
            );
        }

        Ok(NeighborTable { neighbors })
    }

    pub fn get(&self, addr: Ipv4Addr) -> Option<&Neighbor> {
        self.neighbors.get(&addr)
    }

    pub fn relation(&self, addr: Ipv4Addr) -> Option<Relation> {
        self.neighbors.get(&addr).map(|n| n.relation)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Neighbor> {
        self.neighbors.values()
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}

// One datagram per read; the channel serializes delivery into the router
// loop, so per-neighbor arrival order is preserved.
fn spawn_reader(addr: Ipv4Addr, sock: Arc<UdpSocket>, tx: mpsc::UnboundedSender<Inbound>) {
    tokio::spawn(async move {
        let mut buf = vec![0u8; 65535];
        loop {
            match sock.recv(&mut buf).await {
                Ok(len) => {
                    debug!("datagram received", "peer" => addr.to_string(), "bytes" => len);
                    if tx.send((addr, buf[..len].to_vec())).is_err() {
                        // Router loop is gone; nothing left to deliver to.
                        break;
                    }
                }
                Err(e) => {
                    warn!("neighbor socket read failed", "peer" => addr.to_string(), "error" => e.to_string());
                    break;
                }
            }
        }
    });
}
