pub mod webflow;
