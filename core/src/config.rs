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

use crate::peer::Relation;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

#[derive(Debug)]
pub enum ConfigError {
    BadDescriptor(String),
    BadPort(String),
    BadAddress(String),
    BadRelation(String),
    NoNeighbors,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::BadDescriptor(d) => {
                write!(f, "invalid neighbor descriptor '{}', expected PORT-IP-RELATION", d)
            }
            ConfigError::BadPort(p) => write!(f, "invalid port '{}'", p),
            ConfigError::BadAddress(a) => write!(f, "invalid neighbor address '{}'", a),
            ConfigError::BadRelation(r) => write!(f, "{}", r),
            ConfigError::NoNeighbors => write!(f, "at least one neighbor is required"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// One neighbor descriptor from the command line: the simulated endpoint
/// port, the neighbor's logical IPv4 address and its relation to us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborConfig {
    pub port: u16,
    pub addr: Ipv4Addr,
    pub relation: Relation,
}

impl FromStr for NeighborConfig {
    type Err = ConfigError;

    /// Parse `PORT-NEIGHBOR_IP-RELATION`, relation one of cust/peer/prov.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '-');
        let (Some(port), Some(addr), Some(relation)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(ConfigError::BadDescriptor(s.to_string()));
        };

        Ok(NeighborConfig {
            port: port
                .parse()
                .map_err(|_| ConfigError::BadPort(port.to_string()))?,
            addr: addr
                .parse()
                .map_err(|_| ConfigError::BadAddress(addr.to_string()))?,
            relation: Relation::from_str(relation).map_err(ConfigError::BadRelation)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub asn: u32,
    pub neighbors: Vec<NeighborConfig>,
}

impl Config {
    pub fn new<S: AsRef<str>>(asn: u32, descriptors: &[S]) -> Result<Self, ConfigError> {
        if descriptors.is_empty() {
            return Err(ConfigError::NoNeighbors);
        }
        let neighbors = descriptors
            .iter()
            .map(|d| d.as_ref().parse())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Config { asn, neighbors })
    }
}
