mod fanout_engine;

pub use fanout_engine::FanoutEngine;
