mod client;

pub use client::WebflowClient;
