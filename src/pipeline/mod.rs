pub mod segmentation; // LLM boundary markers → verbatim per-problem spans
pub mod editorial; // Article collection, contest matching, enrichment
pub mod diagnostic; // Failed-response dump (auto in dev, EDITORIAL_DUMP_DIR in prod)
