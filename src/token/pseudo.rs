//! Deployment-time pseudo parameters and ARN assembly.

use std::fmt;

use super::{Token, Value};

/// Values supplied by the deployment engine rather than by the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoParameter {
    /// The region the stack is deployed to
    Region,
    /// The partition (`aws`, `aws-cn`, ...) of the region
    Partition,
    /// The account id of the deployment
    AccountId,
    /// The name of the stack
    StackName,
    /// The id of the stack
    StackId,
    /// The domain suffix of the region
    UrlSuffix,
    /// Notification topics attached to the stack
    NotificationArns,
}

impl PseudoParameter {
    /// The name under which the parameter is referenced.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Region => "AWS::Region",
            Self::Partition => "AWS::Partition",
            Self::AccountId => "AWS::AccountId",
            Self::StackName => "AWS::StackName",
            Self::StackId => "AWS::StackId",
            Self::UrlSuffix => "AWS::URLSuffix",
            Self::NotificationArns => "AWS::NotificationARNs",
        }
    }
}

impl fmt::Display for PseudoParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<PseudoParameter> for Value {
    fn from(p: PseudoParameter) -> Self {
        Value::Deferred(Token::Pseudo(p))
    }
}

/// Separator between the resource type and resource name of an ARN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArnSeparator {
    /// `service:...:resource/name`
    #[default]
    Slash,
    /// `service:...:resource:name`
    Colon,
}

impl ArnSeparator {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Slash => "/",
            Self::Colon => ":",
        }
    }
}

/// Components of an ARN.
///
/// `partition`, `region` and `account` fall back to the matching pseudo
/// parameter when left unset, so the ARN follows wherever the stack is
/// deployed. An explicit value, including the empty string for global
/// services, overrides the pseudo parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ArnComponents {
    /// Partition override
    pub partition: Option<Value>,
    /// Service namespace, e.g. `iam` or `execute-api`
    pub service: String,
    /// Region override
    pub region: Option<Value>,
    /// Account override
    pub account: Option<Value>,
    /// Resource type or full resource part
    pub resource: Value,
    /// Separator placed before `resource_name`
    pub sep: ArnSeparator,
    /// Optional resource name
    pub resource_name: Option<Value>,
}

impl ArnComponents {
    /// ARN of `resource` in `service`, deployment-relative everywhere else.
    pub fn new(service: impl Into<String>, resource: impl Into<Value>) -> Self {
        Self {
            partition: None,
            service: service.into(),
            region: None,
            account: None,
            resource: resource.into(),
            sep: ArnSeparator::default(),
            resource_name: None,
        }
    }

    /// Override the partition.
    #[must_use]
    pub fn with_partition(mut self, partition: impl Into<Value>) -> Self {
        self.partition = Some(partition.into());
        self
    }

    /// Override the region (use `""` for global services).
    #[must_use]
    pub fn with_region(mut self, region: impl Into<Value>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Override the account.
    #[must_use]
    pub fn with_account(mut self, account: impl Into<Value>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Append a resource name after the given separator.
    #[must_use]
    pub fn with_resource_name(mut self, sep: ArnSeparator, name: impl Into<Value>) -> Self {
        self.sep = sep;
        self.resource_name = Some(name.into());
        self
    }

    /// The flat list of join parts, delimiter included.
    pub(crate) fn to_parts(&self) -> Vec<Value> {
        let or_pseudo = |v: &Option<Value>, p: PseudoParameter| v.clone().unwrap_or_else(|| p.into());

        let mut parts = vec![
            Value::from("arn"),
            Value::from(":"),
            or_pseudo(&self.partition, PseudoParameter::Partition),
            Value::from(":"),
            Value::from(self.service.as_str()),
            Value::from(":"),
            or_pseudo(&self.region, PseudoParameter::Region),
            Value::from(":"),
            or_pseudo(&self.account, PseudoParameter::AccountId),
            Value::from(":"),
            self.resource.clone(),
        ];
        if let Some(name) = &self.resource_name {
            parts.push(Value::from(self.sep.as_str()));
            parts.push(name.clone());
        }
        parts
    }

    /// References in the order the parts appear in the rendered ARN.
    pub(crate) fn collect_references(&self, out: &mut Vec<crate::tree::NodeId>) {
        for part in [&self.partition, &self.region, &self.account]
            .into_iter()
            .flatten()
        {
            part.collect_references(out);
        }
        self.resource.collect_references(out);
        if let Some(name) = &self.resource_name {
            name.collect_references(out);
        }
    }
}
