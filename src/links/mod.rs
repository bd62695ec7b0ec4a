// SPDX-License-Identifier: GPL-3.0-only
pub mod extractor;
pub mod workshop_id;

pub use extractor::LinkExtractor;
pub use workshop_id::WorkshopId;
