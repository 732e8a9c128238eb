//! # ドメイン層エラー定義
//!
//! 設定値の検証など、ドメインルール違反を表現するエラー型。
//!
//! 送信失敗（API エラー、通信エラー）はここには含めない。
//! それらは想定内の結果として [`crate::outcome::MailFailure`] で表現する。

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 入力値（主に管理者が入力した設定値）がルールに違反している場合に使用する。
    #[error("バリデーションエラー: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validationのメッセージに理由が含まれる() {
        let err = DomainError::Validation("送信元アドレスが不正です".to_string());
        assert_eq!(
            err.to_string(),
            "バリデーションエラー: 送信元アドレスが不正です"
        );
    }
}
