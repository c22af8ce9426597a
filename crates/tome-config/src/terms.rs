//! Default dictionary for technical term case correction.
//!
//! Keys are lowercase; each correction has the same byte length as its key.

use std::collections::HashMap;

const TERMS: &[(&str, &str)] = &[
    ("ajax", "AJAX"),
    ("android", "Android"),
    ("angularjs", "AngularJS"),
    ("api", "API"),
    ("centos", "CentOS"),
    ("chrome", "Chrome"),
    ("cors", "CORS"),
    ("cpu", "CPU"),
    ("css", "CSS"),
    ("csv", "CSV"),
    ("dynamodb", "DynamoDB"),
    ("elasticsearch", "Elasticsearch"),
    ("facebook", "Facebook"),
    ("ffmpeg", "FFmpeg"),
    ("firefox", "Firefox"),
    ("git", "Git"),
    ("github", "GitHub"),
    ("gitlab", "GitLab"),
    ("graphql", "GraphQL"),
    ("html", "HTML"),
    ("iaas", "IaaS"),
    ("ios", "iOS"),
    ("ipad", "iPad"),
    ("iphone", "iPhone"),
    ("java", "Java"),
    ("javascript", "JavaScript"),
    ("jdk", "JDK"),
    ("jquery", "jQuery"),
    ("json", "JSON"),
    ("linux", "Linux"),
    ("macbook", "MacBook"),
    ("mariadb", "MariaDB"),
    ("markdown", "Markdown"),
    ("mongodb", "MongoDB"),
    ("mysql", "MySQL"),
    ("oauth", "OAuth"),
    ("openjdk", "OpenJDK"),
    ("paas", "PaaS"),
    ("php", "PHP"),
    ("postgresql", "PostgreSQL"),
    ("protobuf", "Protobuf"),
    ("redis", "Redis"),
    ("saas", "SaaS"),
    ("safari", "Safari"),
    ("sql", "SQL"),
    ("sqlite", "SQLite"),
    ("ssh", "SSH"),
    ("ubuntu", "Ubuntu"),
    ("vpn", "VPN"),
    ("vps", "VPS"),
    ("websocket", "WebSocket"),
    ("xml", "XML"),
    ("yaml", "YAML"),
    ("youtube", "YouTube"),
];

/// The built-in term dictionary.
pub fn default_terms() -> HashMap<String, String> {
    TERMS
        .iter()
        .map(|(from, to)| ((*from).to_owned(), (*to).to_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_terms_are_lowercase_and_same_length() {
        for (from, to) in TERMS {
            assert_eq!(*from, from.to_lowercase(), "key {from} must be lowercase");
            assert_eq!(from.len(), to.len(), "{from} -> {to} changes length");
            assert!(from.eq_ignore_ascii_case(to), "{from} -> {to} is not a case fix");
        }
    }

    #[test]
    fn test_default_terms_lookup() {
        let terms = default_terms();
        assert_eq!(terms.get("github").map(String::as_str), Some("GitHub"));
        assert_eq!(terms.len(), TERMS.len());
    }
}
