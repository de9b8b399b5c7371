//! IAM policy documents CAST AI needs in an EKS account

use serde_json::{json, Value};

pub const MANAGED_POLICIES: [&str; 2] = [
    "arn:aws:iam::aws:policy/AmazonEC2ReadOnlyAccess",
    "arn:aws:iam::aws:policy/IAMReadOnlyAccess",
];

/// Role level policy: lets CAST AI pass roles and manage instance profiles
pub fn iam_policy(account_id: &str) -> Result<String, serde_json::Error> {
    let document = json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Sid": "PassRoleEC2",
                "Action": "iam:PassRole",
                "Effect": "Allow",
                "Resource": format!("arn:aws:iam::{}:role/*", account_id),
                "Condition": {
                    "StringEquals": {"iam:PassedToService": "ec2.amazonaws.com"}
                }
            },
            {
                "Sid": "NonResourcePermissions",
                "Effect": "Allow",
                "Action": [
                    "iam:CreateServiceLinkedRole",
                    "ec2:CreateKeyPair",
                    "ec2:DeleteKeyPair",
                    "ec2:CreateTags",
                    "ec2:ImportKeyPair"
                ],
                "Resource": "*"
            },
            {
                "Sid": "RunInstancesPermissions",
                "Effect": "Allow",
                "Action": "ec2:RunInstances",
                "Resource": [
                    format!("arn:aws:ec2:*:{}:network-interface/*", account_id),
                    format!("arn:aws:ec2:*:{}:security-group/*", account_id),
                    format!("arn:aws:ec2:*:{}:volume/*", account_id),
                    format!("arn:aws:ec2:*:{}:key-pair/*", account_id),
                    "arn:aws:ec2:*::image/*"
                ]
            }
        ]
    });
    render(&document)
}

/// User inline policy, scoped to one cluster's instances and VPC.
/// `arn` is `<region>:<account id>`.
pub fn user_inline_policy(cluster: &str, arn: &str, vpc: &str) -> Result<String, serde_json::Error> {
    let cluster_tag = format!("ec2:ResourceTag/kubernetes.io/cluster/{}", cluster);
    let document = json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Sid": "RunInstancesTagRestriction",
                "Effect": "Allow",
                "Action": "ec2:RunInstances",
                "Resource": format!("arn:aws:ec2:{}:instance/*", arn),
                "Condition": {
                    "StringEquals": {
                        format!("aws:RequestTag/kubernetes.io/cluster/{}", cluster): "owned"
                    }
                }
            },
            {
                "Sid": "RunInstancesVpcRestriction",
                "Effect": "Allow",
                "Action": "ec2:RunInstances",
                "Resource": format!("arn:aws:ec2:{}:subnet/*", arn),
                "Condition": {
                    "StringEquals": {"ec2:Vpc": format!("arn:aws:ec2:{}:vpc/{}", arn, vpc)}
                }
            },
            {
                "Sid": "InstanceActionsTagRestriction",
                "Effect": "Allow",
                "Action": [
                    "ec2:TerminateInstances",
                    "ec2:StartInstances",
                    "ec2:StopInstances",
                    "ec2:CreateTags"
                ],
                "Resource": format!("arn:aws:ec2:{}:instance/*", arn),
                "Condition": {
                    "StringEquals": {cluster_tag.clone(): ["owned", "shared"]}
                }
            },
            {
                "Sid": "AutoscalingActionsTagRestriction",
                "Effect": "Allow",
                "Action": [
                    "autoscaling:UpdateAutoScalingGroup",
                    "autoscaling:SuspendProcesses",
                    "autoscaling:ResumeProcesses",
                    "autoscaling:TerminateInstanceInAutoScalingGroup"
                ],
                "Resource": format!("arn:aws:autoscaling:{}:autoScalingGroup:*:autoScalingGroupName/*", arn),
                "Condition": {
                    "StringEquals": {
                        format!("autoscaling:ResourceTag/kubernetes.io/cluster/{}", cluster): ["owned", "shared"]
                    }
                }
            },
            {
                "Sid": "EKS",
                "Effect": "Allow",
                "Action": [
                    "eks:Describe*",
                    "eks:List*"
                ],
                "Resource": [
                    format!("arn:aws:eks:{}:cluster/{}", arn, cluster),
                    format!("arn:aws:eks:{}:nodegroup/{}/*/*", arn, cluster)
                ]
            }
        ]
    });
    render(&document)
}

fn render(document: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(document)
}
