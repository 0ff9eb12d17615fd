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

use std::fmt;
use std::net::Ipv4Addr;

/// An IPv4 prefix as carried on the wire: a network address plus a netmask.
///
/// The netmask is kept in dotted-quad form rather than a prefix length
/// because announcements carry masks verbatim and non-contiguous masks must
/// be tolerated (the prefix length of a non-contiguous mask is its count of
/// leading one bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Net {
    pub network: Ipv4Addr,
    pub netmask: Ipv4Addr,
}

impl Ipv4Net {
    pub fn new(network: Ipv4Addr, netmask: Ipv4Addr) -> Self {
        Ipv4Net { network, netmask }
    }

    /// Count of leading one bits in the netmask.
    pub fn prefix_length(&self) -> u8 {
        u32::from(self.netmask).leading_ones() as u8
    }

    /// Membership test: `ip & mask == network & mask`.
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        let mask = u32::from(self.netmask);
        (u32::from(ip) & mask) == (u32::from(self.network) & mask)
    }

    /// Two equal-mask prefixes are adjacent when the higher network starts
    /// exactly one address past the end of the lower one. The pair is
    /// ordered before testing, so argument order does not matter.
    pub fn is_adjacent(&self, other: &Ipv4Net) -> bool {
        if self.netmask != other.netmask {
            return false;
        }
        let mask = u32::from(self.netmask);
        let (lo, hi) = if self.network <= other.network {
            (u32::from(self.network), u32::from(other.network))
        } else {
            (u32::from(other.network), u32::from(self.network))
        };
        hi == (lo | !mask).wrapping_add(1)
    }

    /// Union of two adjacent equal-mask prefixes: the mask loses its last
    /// one bit and the lower network is truncated to the widened boundary.
    pub fn merge(&self, other: &Ipv4Net) -> Ipv4Net {
        let merged_mask = u32::from(self.netmask) << 1;
        let lo = u32::from(self.network.min(other.network));
        Ipv4Net {
            network: Ipv4Addr::from(lo & merged_mask),
            netmask: Ipv4Addr::from(merged_mask),
        }
    }
}

impl fmt::Display for Ipv4Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_length())
    }
}
