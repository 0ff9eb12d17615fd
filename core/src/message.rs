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

//! Wire codec for the UDP control protocol.
//!
//! Every datagram is one JSON object with top-level fields `type`, `src`,
//! `dst` and a per-type `msg` payload. Unknown `type` tags and missing
//! required fields are rejected at parse time; the dispatcher logs and
//! drops them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::net::Ipv4Addr;

/// Route origin attribute. IGP is preferred over EGP, EGP over UNK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    IGP = 0,
    EGP = 1,
    UNK = 2,
}

/// Payload of an `update` message.
///
/// A received announcement must carry all six fields; the propagated form
/// keeps only the public three (network, netmask, ASPath). The private
/// attributes are therefore optional here and validated at the dispatch
/// edge when the update is accepted into the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteParams {
    pub network: Ipv4Addr,
    pub netmask: Ipv4Addr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub localpref: Option<u32>,
    #[serde(rename = "ASPath")]
    pub as_path: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
    #[serde(rename = "selfOrigin", skip_serializing_if = "Option::is_none")]
    pub self_origin: Option<bool>,
}

/// One entry of a `withdraw` message list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrefixParams {
    pub network: Ipv4Addr,
    pub netmask: Ipv4Addr,
}

/// One route in a `table` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRoute {
    pub network: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub peer: Ipv4Addr,
    pub localpref: u32,
    #[serde(rename = "ASPath")]
    pub as_path: Vec<u32>,
    pub origin: Origin,
    #[serde(rename = "selfOrigin")]
    pub self_origin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Handshake {
        src: Ipv4Addr,
        dst: Ipv4Addr,
        #[serde(default)]
        msg: Value,
    },
    Update {
        src: Ipv4Addr,
        dst: Ipv4Addr,
        msg: RouteParams,
    },
    Withdraw {
        src: Ipv4Addr,
        dst: Ipv4Addr,
        msg: Vec<PrefixParams>,
    },
    /// Opaque payload fields are captured verbatim so the message forwards
    /// unchanged regardless of whether the payload key is `msg`, `payload`
    /// or anything else.
    Data {
        src: Ipv4Addr,
        dst: Ipv4Addr,
        #[serde(flatten)]
        payload: Map<String, Value>,
    },
    Dump {
        src: Ipv4Addr,
        dst: Ipv4Addr,
        #[serde(default)]
        msg: Value,
    },
    Table {
        src: Ipv4Addr,
        dst: Ipv4Addr,
        msg: Vec<TableRoute>,
    },
    #[serde(rename = "no route")]
    NoRoute {
        src: Ipv4Addr,
        dst: Ipv4Addr,
        msg: Value,
    },
}

impl Message {
    pub fn from_slice(buf: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(buf)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
