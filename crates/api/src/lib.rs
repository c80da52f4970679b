// Re-export the generated proto code
pub mod store {
    include!(concat!(env!("OUT_DIR"), "/floe.store.rs"));
}
