//! Route names for request logs.

use uuid::Uuid;

/// Replace uuid path segments with `{uuid}` so requests group by route.
pub(super) fn route_template(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let mut template = String::from("/");

    for (index, segment) in path.trim_start_matches('/').split('/').enumerate() {
        if index > 0 {
            template.push('/');
        }

        if Uuid::parse_str(segment).is_ok() {
            template.push_str("{uuid}");
        } else {
            template.push_str(segment);
        }
    }

    template
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_segments_are_replaced() {
        let order = Uuid::now_v7();

        assert_eq!(
            route_template(&format!("/orders/{order}/payments")),
            "/orders/{uuid}/payments"
        );
        assert_eq!(route_template("/admin/payments/summary"), "/admin/payments/summary");
        assert_eq!(route_template("/"), "/");
    }
}
