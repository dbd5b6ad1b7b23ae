// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turns the tagged-union [`AdapterConfig`] into a live, tracing-wrapped
//! [`AdapterPort`] trait object (§4.1, §9 "polymorphism without inheritance").

use kwf_adapters::{AdapterError, AdapterPort, GithubAdapter, LinearAdapter, PlaneAdapter, PlankaAdapter, TracedAdapter};
use kwf_storage::AdapterConfig;

pub fn build(config: AdapterConfig) -> Result<Box<dyn AdapterPort>, AdapterError> {
    Ok(match config {
        AdapterConfig::Github(c) => Box::new(TracedAdapter::new(GithubAdapter::new(c)?)),
        AdapterConfig::Linear(c) => Box::new(TracedAdapter::new(LinearAdapter::new(c)?)),
        AdapterConfig::Plane(c) => Box::new(TracedAdapter::new(PlaneAdapter::new(c)?)),
        AdapterConfig::Planka(c) => Box::new(TracedAdapter::new(PlankaAdapter::new(c)?)),
    })
}
