//! Cluster state, reconciliation and routing tests

mod reconcile_tests;
