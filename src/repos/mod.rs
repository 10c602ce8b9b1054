pub mod event_repo;
