use crate::domain::model::{CommandOutput, Invocation};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 執行外部程式的介面；測試以記錄式實作替換
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// 程式無法啟動時回傳錯誤；非零結束碼由呼叫端判斷
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;
}
