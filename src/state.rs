/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - gateway: operation registry + auth chain
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::gateway::Gateway;

#[derive(Clone, Debug)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
}

impl AppState {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }
}
