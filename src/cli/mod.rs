mod ask;

pub use ask::passage_cli;
