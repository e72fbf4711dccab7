#![forbid(unsafe_code)]

mod action;
mod changelist;
mod crud;
mod history;

use crate::*;
use serde_json::{Value, json};

macro_rules! define_admin_dispatch {
    ($($method_name:literal => $method:ident),* $(,)?) => {
        pub(crate) fn dispatch_method(
            server: &mut AdminServer,
            name: &str,
            args: Args,
        ) -> Option<Value> {
            let resp = match name {
                $($method_name => server.$method(args),)*
                _ => return None,
            };
            Some(resp)
        }

        pub(crate) fn dispatch_method_names() -> &'static [&'static str] {
            &[$($method_name),*]
        }
    };
}

define_admin_dispatch! {
    "site" => method_site,
    "changelist" => method_changelist,
    "get" => method_get,
    "add" => method_add,
    "change" => method_change,
    "delete" => method_delete,
    "action" => method_action,
    "history" => method_history,
}

impl AdminServer {
    pub(crate) fn method_site(&mut self, _args: Args) -> Value {
        let mut result = self.site.describe();
        if let Some(obj) = result.as_object_mut() {
            obj.insert("methods".to_string(), json!(dispatch_method_names()));
        }
        ai_ok("site", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn method_names_are_unique() {
        let names = dispatch_method_names();
        let unique = names.iter().collect::<BTreeSet<_>>();
        assert_eq!(unique.len(), names.len());
        assert!(!names.contains(&"ping"));
    }
}
