
/// A review card the way the site currently renders it
pub const PRIMARY_PAGE: &str = r#"
<html><body>
  <div class="styles_cardWrapper__LcCPA styles_show__HUXRb">
    <article>
      <div class="styles_reviewCardInnerHeader__8Xqy8"><span>Jane</span></div>
      <time datetime="2024-01-15" data-service-review-date-time-ago="true">Jan 15, 2024</time>
      <p class="typography_body-l__v5JLj typography_appearance-default__t8iAq">Great service</p>
    </article>
  </div>
</body></html>
"#;
