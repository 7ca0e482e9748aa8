//! Core request details: the descriptive payload of mission and leave requests
use super::error::ValidationError;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, Eq, Ord, PartialEq, PartialOrd)]
pub enum MissionType {
    #[n(0)]
    Local,
    #[n(1)]
    International,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, Eq, Ord, PartialEq, PartialOrd)]
pub enum LeaveType {
    #[n(0)]
    Annual,
    #[n(1)]
    Sick,
    #[n(2)]
    Maternity,
    #[n(3)]
    Paternity,
    #[n(4)]
    Study,
    #[n(5)]
    Unpaid,
    #[n(6)]
    Other,
}

impl LeaveType {
    pub fn title(&self) -> &'static str {
        match self {
            LeaveType::Annual => "Annual Leave",
            LeaveType::Sick => "Sick Leave",
            LeaveType::Maternity => "Maternity Leave",
            LeaveType::Paternity => "Paternity Leave",
            LeaveType::Study => "Study Leave",
            LeaveType::Unpaid => "Unpaid Leave",
            LeaveType::Other => "Other",
        }
    }
}

/// Routing key of the approval table: which family a request belongs to,
/// and for missions, which subtype.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    #[n(0)]
    Leave,
    #[n(1)]
    Mission(#[n(0)] MissionType),
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    pub fn new_with(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .unwrap()
            .into()
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}

/// A calendar day without a time component. Mission and leave spans are
/// whole days in the request forms.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn new_with(year: i32, month: u32, day: u32) -> Self {
        Self(NaiveDate::from_ymd_opt(year, month, day).unwrap())
    }
    pub fn to_naive_date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(value: NaiveDate) -> Self {
        CalendarDate(value)
    }
}

impl<C> minicbor::Encode<C> for CalendarDate {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.i32(self.0.num_days_from_ce())?.ok()
    }
}

impl<'b, C> minicbor::Decode<'b, C> for CalendarDate {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let days = d.i32()?;

        NaiveDate::from_num_days_from_ce_opt(days)
            .map(CalendarDate)
            .ok_or(minicbor::decode::Error::message(
                "failed to convert day count to a calendar date",
            ))
    }
}

// Also used for constructing drafts
// Key is the hash of this struct encoded into CBOR
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Default, Eq, PartialEq)]
pub struct MissionDetails {
    // No ID field, as the ID *is* the hash of this struct
    #[n(0)]
    title: Option<String>,
    #[n(1)]
    description: Option<String>,
    #[n(2)]
    mission_type: Option<MissionType>,
    #[n(3)]
    destination: Option<String>,
    #[n(4)]
    purpose: Option<String>,
    #[n(5)]
    start_date: Option<CalendarDate>,
    #[n(6)]
    end_date: Option<CalendarDate>,
    #[n(7)]
    estimated_cost: u64, // minor units
}

impl MissionDetails {
    /// Construct a new builder object, this becomes the basis for a draft
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
    pub fn set_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
    pub fn set_mission_type(mut self, mission_type: MissionType) -> Self {
        self.mission_type = Some(mission_type);
        self
    }
    pub fn set_destination(mut self, destination: &str) -> Self {
        self.destination = Some(destination.to_string());
        self
    }
    pub fn set_purpose(mut self, purpose: &str) -> Self {
        self.purpose = Some(purpose.to_string());
        self
    }
    pub fn set_start_date(mut self, date: CalendarDate) -> Self {
        self.start_date = Some(date);
        self
    }
    pub fn set_end_date(mut self, date: CalendarDate) -> Self {
        self.end_date = Some(date);
        self
    }
    pub fn set_estimated_cost(mut self, amount: u64) -> Self {
        self.estimated_cost = amount;
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    pub fn mission_type(&self) -> Option<MissionType> {
        self.mission_type
    }
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }
    pub fn purpose(&self) -> Option<&str> {
        self.purpose.as_deref()
    }
    pub fn start_date(&self) -> Option<CalendarDate> {
        self.start_date
    }
    pub fn end_date(&self) -> Option<CalendarDate> {
        self.end_date
    }
    pub fn estimated_cost(&self) -> u64 {
        self.estimated_cost
    }

    /// Checks if the predicate `start <= end` is true
    pub fn validate_dates(&self) -> bool {
        match (self.start_date.as_ref(), self.end_date.as_ref()) {
            (Some(start), Some(end)) => start <= end,
            _ => false,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.title.is_none() {
            return Err(ValidationError::MissingField("title"));
        }
        if self.description.is_none() {
            return Err(ValidationError::MissingField("description"));
        }
        if self.mission_type.is_none() {
            return Err(ValidationError::MissingField("mission_type"));
        }
        if self.destination.is_none() {
            return Err(ValidationError::MissingField("destination"));
        }
        if self.purpose.is_none() {
            return Err(ValidationError::MissingField("purpose"));
        }
        if self.start_date.is_none() {
            return Err(ValidationError::MissingField("start_date"));
        }
        if self.end_date.is_none() {
            return Err(ValidationError::MissingField("end_date"));
        }
        if self.estimated_cost == 0 {
            return Err(ValidationError::ZeroCost);
        }
        if !self.validate_dates() {
            return Err(ValidationError::InvalidDates);
        }
        Ok(())
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Default, Eq, PartialEq)]
pub struct LeaveDetails {
    // No ID field, as the ID *is* the hash of this struct
    #[n(0)]
    leave_type: Option<LeaveType>,
    #[n(1)]
    reason: Option<String>,
    #[n(2)]
    start_date: Option<CalendarDate>,
    #[n(3)]
    end_date: Option<CalendarDate>,
}

impl LeaveDetails {
    /// Construct a new builder object, this becomes the basis for a draft
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_leave_type(mut self, leave_type: LeaveType) -> Self {
        self.leave_type = Some(leave_type);
        self
    }
    pub fn set_reason(mut self, reason: &str) -> Self {
        self.reason = Some(reason.to_string());
        self
    }
    pub fn set_start_date(mut self, date: CalendarDate) -> Self {
        self.start_date = Some(date);
        self
    }
    pub fn set_end_date(mut self, date: CalendarDate) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn leave_type(&self) -> Option<LeaveType> {
        self.leave_type
    }
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
    pub fn start_date(&self) -> Option<CalendarDate> {
        self.start_date
    }
    pub fn end_date(&self) -> Option<CalendarDate> {
        self.end_date
    }

    /// Checks if the predicate `start <= end` is true
    pub fn validate_dates(&self) -> bool {
        match (self.start_date.as_ref(), self.end_date.as_ref()) {
            (Some(start), Some(end)) => start <= end,
            _ => false,
        }
    }

    /// Span of the leave in whole days, inclusive of both endpoints.
    pub fn duration_days(&self) -> Option<i64> {
        match (self.start_date.as_ref(), self.end_date.as_ref()) {
            (Some(start), Some(end)) => {
                Some((end.to_naive_date() - start.to_naive_date()).num_days() + 1)
            }
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.leave_type.is_none() {
            return Err(ValidationError::MissingField("leave_type"));
        }
        if self.reason.is_none() {
            return Err(ValidationError::MissingField("reason"));
        }
        if self.start_date.is_none() {
            return Err(ValidationError::MissingField("start_date"));
        }
        if self.end_date.is_none() {
            return Err(ValidationError::MissingField("end_date"));
        }
        if !self.validate_dates() {
            return Err(ValidationError::InvalidDates);
        }
        Ok(())
    }
}

/// The two request families share one envelope so the service and the
/// document pipeline can treat them uniformly.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Eq, PartialEq)]
pub enum RequestDetails {
    #[n(0)]
    Mission(#[n(0)] MissionDetails),
    #[n(1)]
    Leave(#[n(0)] LeaveDetails),
}

impl RequestDetails {
    /// The routing key for the approval table. Missions must carry their
    /// subtype before routing is possible.
    pub fn domain(&self) -> Option<Domain> {
        match self {
            RequestDetails::Mission(m) => m.mission_type().map(Domain::Mission),
            RequestDetails::Leave(_) => Some(Domain::Leave),
        }
    }

    /// Short human label used in documents and notification subjects.
    pub fn label(&self) -> String {
        match self {
            RequestDetails::Mission(m) => m.title().unwrap_or("Mission Request").to_string(),
            RequestDetails::Leave(l) => l
                .leave_type()
                .map(|t| t.title().to_string())
                .unwrap_or_else(|| "Leave Request".to_string()),
        }
    }

    // Checks fields, and performs validation. returns a hash of the request
    // and its contents serialised into cbor
    pub fn validate_and_finalise(&self) -> anyhow::Result<(String, Vec<u8>)> {
        match self {
            RequestDetails::Mission(m) => m.validate()?,
            RequestDetails::Leave(l) => l.validate()?,
        }

        let contents = minicbor::to_vec(self)?;
        let hash = sha256::digest(&contents);

        Ok((hash, contents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_encoding() {
        let original = TimeStamp::new();

        let encoding = minicbor::to_vec(original.clone()).unwrap();
        let decode: TimeStamp<Utc> = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }

    #[test]
    fn calendar_date_encoding() {
        let original = CalendarDate::new_with(2026, 3, 14);

        let encoding = minicbor::to_vec(original).unwrap();
        let decode: CalendarDate = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }

    #[test]
    fn leave_duration_counts_both_endpoints() {
        let leave = LeaveDetails::new()
            .set_start_date(CalendarDate::new_with(2026, 5, 4))
            .set_end_date(CalendarDate::new_with(2026, 5, 8));

        assert_eq!(leave.duration_days(), Some(5));
    }
}
