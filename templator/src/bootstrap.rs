use stack_defs::{Expr, AWS_REGION, AWS_STACK_NAME};

const CFN_BOOTSTRAP_URL: &str =
    "https://s3.amazonaws.com/cloudformation-examples/aws-cfn-bootstrap-latest.tar.gz";

/// Base64 user data that installs the bootstrap tools and runs `cfn-init`
/// against the metadata of `resource`, which must be the logical name of the
/// instance carrying the user data.
pub(crate) fn cfn_init_user_data(resource: &str) -> Expr {
    Expr::base64(Expr::join(
        "",
        vec![
            Expr::from("#!/bin/bash -xe\n"),
            Expr::from("curl https://bootstrap.pypa.io/get-pip.py | python\n"),
            Expr::from(format!("pip install {}\n", CFN_BOOTSTRAP_URL)),
            Expr::from("/usr/local/bin/cfn-init -v "),
            Expr::from("         --stack "),
            Expr::reference(AWS_STACK_NAME),
            Expr::from(format!("         --resource {} ", resource)),
            Expr::from("         --region "),
            Expr::reference(AWS_REGION),
            Expr::from("\n"),
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_user_data_targets_resource() {
        let value = serde_json::to_value(cfn_init_user_data("GameServer")).unwrap();
        let parts = value["Fn::Base64"]["Fn::Join"][1].as_array().unwrap();

        assert_eq!(parts[0], json!("#!/bin/bash -xe\n"));
        assert_eq!(parts[5], json!({"Ref": "AWS::StackName"}));
        assert_eq!(parts[6], json!("         --resource GameServer "));
        assert_eq!(parts[8], json!({"Ref": "AWS::Region"}));
        assert_eq!(parts.len(), 10);
    }
}
