/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth (Bearer 検証 + グループ認可), cors, http (request id / trace / limit / timeout)
 */
pub mod auth;
pub mod cors;
pub mod http;
