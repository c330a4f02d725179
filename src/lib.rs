pub mod shared {
    pub mod infrastructure {
        pub mod job_queue;
        pub mod keyed_locks;
        pub mod rate_limiter;
    }
}

pub mod modules {
    pub mod exercise_progress {
        pub mod core {
            pub mod aggregate;
            pub mod exercise_key;
            pub mod stats;
            pub mod workout;
        }
        pub mod use_cases {
            pub mod track_workout_progress {
                pub mod command;
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod reconcile_progress {
                pub mod handler;
                pub mod job;
                pub mod rebuild;
                pub mod worker;
            }
            pub mod list_workout_progress {
                pub mod handler;
                pub mod inbound {
                    pub mod graphql;
                    pub mod http;
                }
                pub mod query;
            }
            pub mod request_progress_recalculation {
                pub mod handler;
                pub mod inbound {
                    pub mod graphql;
                    pub mod http;
                }
            }
        }
        pub mod adapters {
            pub mod outbound {
                pub mod aggregate_store;
                pub mod aggregate_store_in_memory;
                pub mod user_directory;
                pub mod workout_source;
                pub mod workout_source_in_memory;
            }
        }
    }
}

pub mod shell;
