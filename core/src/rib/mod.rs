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

//! Routing state: the forwarding table, the route record with its decision
//! order, and the update journal that lets the table be rebuilt after a
//! withdrawal invalidates aggregates.

mod journal;
mod route;
mod table;

pub use journal::Journal;
pub use route::{Route, RouteAttrs};
pub use table::ForwardingTable;
