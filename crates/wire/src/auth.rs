// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `/auth` redirect query merge (§6, Invariant 7; SPEC_FULL §C.7): a
//! pure string transform, independent of job state, so it is tested
//! directly here rather than through an HTTP round trip.

/// `a=` values every `/auth` redirect must include, in this order.
const DEFAULT_AUTH_PANELS: [&str; 2] = ["auth-apikeys", "auth-cookies"];

/// Builds the `Location` target for a `/auth` or `/auth/` request: redirects
/// to `/settings`, merging any incoming `a=` query value with the default
/// auth panels and preserving every other query key untouched.
pub fn auth_redirect_location(original_query: Option<&str>) -> String {
    let mut a_values: Vec<String> = Vec::new();
    let mut other_params: Vec<(String, String)> = Vec::new();

    for pair in original_query.unwrap_or("").split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key == "a" {
            for value in value.split(',').filter(|v| !v.is_empty()) {
                if !a_values.iter().any(|existing| existing == value) {
                    a_values.push(value.to_string());
                }
            }
        } else {
            other_params.push((key.to_string(), value.to_string()));
        }
    }

    for default in DEFAULT_AUTH_PANELS {
        if !a_values.iter().any(|existing| existing == default) {
            a_values.push(default.to_string());
        }
    }

    let mut query = format!("a={}", a_values.join(","));
    for (key, value) in other_params {
        query.push('&');
        query.push_str(&key);
        if !value.is_empty() {
            query.push('=');
            query.push_str(&value);
        }
    }

    format!("/settings?{query}")
}
