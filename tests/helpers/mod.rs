// ==========================================
// 集成测试辅助模块
// ==========================================

#![allow(dead_code)]

pub mod api_test_helper;
pub mod geo_fixture;
