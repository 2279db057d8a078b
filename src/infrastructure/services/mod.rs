//! Infrastructure services

mod dashboard_service;

pub use dashboard_service::{
    AnalyticsRepositories, CategoryDashboard, CompetitorOutcome, DashboardConfig,
    DashboardService, FlowStep, ProductDashboard, ProgressReporter, TracingProgressReporter,
    LAST_RUN_ASIN_KEY, LAST_RUN_PRODUCT_KEY, LAST_RUN_RESULTS_KEY,
};
